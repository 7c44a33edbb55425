//! Request routing.
//!
//! Routing is a closed table of `(method, exact path)` pairs. Matching is
//! case-sensitive and exact; anything that misses the table falls through to
//! the generic echo handler for its method, so there is no 404 path by
//! design.

use http::Method;
use tracing::debug;

/// The closed set of handler behaviors the server knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// GET `/tasklist` — render the current task list as HTML.
    TaskList,
    /// GET `/tasklist/new` — render the add-task form.
    NewTaskForm,
    /// POST `/tasklist/new` — append a task from the form body, redirect.
    AppendTask,
    /// POST `/shutdown` — acknowledge, then shut the server down.
    Shutdown,
    /// Fallback for any other GET: echo request metadata as JSON.
    EchoGet,
    /// Fallback for any other POST: echo metadata plus the decoded body.
    EchoPost,
}

/// Maps `(method, path)` to a [`Route`] via an exact-match lookup table.
pub struct Router {
    table: Vec<(Method, &'static str, Route)>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: vec![
                (Method::GET, "/tasklist", Route::TaskList),
                (Method::GET, "/tasklist/new", Route::NewTaskForm),
                (Method::POST, "/tasklist/new", Route::AppendTask),
                (Method::POST, "/shutdown", Route::Shutdown),
            ],
        }
    }

    /// Resolve a request to a route. Never fails: unmatched paths echo.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Route {
        let route = self
            .table
            .iter()
            .find(|(m, p, _)| m == method && *p == path)
            .map_or_else(
                || {
                    if method == Method::POST {
                        Route::EchoPost
                    } else {
                        Route::EchoGet
                    }
                },
                |(_, _, r)| *r,
            );
        debug!(method = %method, path = %path, route = ?route, "route resolved");
        route
    }
}
