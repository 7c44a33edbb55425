//! Minimal HTML views for the task list pages.
//!
//! Two pages only, so these are plain string builders rather than a template
//! engine. Task names are user input and get escaped before they reach the
//! page.

/// Escape text for safe interpolation into HTML content and attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the task list page.
///
/// Each task gets a removal link of the form `/tasklist/<task>/remove`. The
/// link is rendered for parity with the page's original design even though
/// no route serves it.
#[must_use]
pub fn render_task_list(tasks: &[String]) -> String {
    let mut items = String::new();
    for task in tasks {
        let name = escape(task);
        items.push_str(&format!(
            "    <li>{name} <a href=\"/tasklist/{name}/remove\">remove</a></li>\n"
        ));
    }
    if items.is_empty() {
        items.push_str("    <li>No tasks yet</li>\n");
    }
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Task List</title></head>\n<body>\n\
         <h1>Task List</h1>\n  <ul>\n{items}  </ul>\n\
         <p><a href=\"/tasklist/new\">Add a task</a></p>\n</body>\n</html>\n"
    )
}

/// Render the add-task form. Submits `task=<text>` to POST `/tasklist/new`.
#[must_use]
pub fn render_new_task_form() -> String {
    "<!DOCTYPE html>\n<html>\n<head><title>New Task</title></head>\n<body>\n\
     <h1>New Task</h1>\n\
     <form method=\"post\" action=\"/tasklist/new\">\n\
       <input type=\"text\" name=\"task\" autofocus>\n\
       <button type=\"submit\">Add</button>\n\
     </form>\n\
     <p><a href=\"/tasklist\">Back to the list</a></p>\n</body>\n</html>\n"
        .to_string()
}
