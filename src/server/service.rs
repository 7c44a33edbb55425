use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::info;

use super::request::{ClientInfo, ParsedRequest};
use super::response::Response;
use crate::html;
use crate::middleware::Middleware;
use crate::router::{Route, Router};
use crate::store::TaskStore;

/// Outcome of handling one request.
pub struct Handled {
    pub response: Response,
    /// Set by the shutdown route: the caller must flush the response first,
    /// then trigger shutdown on a separate execution unit.
    pub shutdown: bool,
}

impl Handled {
    fn response(response: Response) -> Self {
        Self {
            response,
            shutdown: false,
        }
    }
}

/// The application pipeline: middleware chain, router, and handlers around
/// the shared task store.
pub struct AppService {
    router: Router,
    pub store: Arc<TaskStore>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl AppService {
    #[must_use]
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self {
            router: Router::new(),
            store,
            middlewares: Vec::new(),
        }
    }

    /// Append a middleware stage. Stages run in registration order;
    /// register the authorization gate before anything with side effects.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Run one request through the middleware chain and, unless a stage
    /// short-circuited, the router and its handler.
    pub fn handle(&self, req: &ParsedRequest, client: &ClientInfo) -> Handled {
        let start = Instant::now();

        let mut early: Option<Response> = None;
        for mw in &self.middlewares {
            match mw.before(req, client) {
                Some(resp) if early.is_none() => early = Some(resp),
                _ => {}
            }
        }

        let mut handled = match early {
            Some(response) => Handled::response(response),
            None => self.dispatch(req, client),
        };

        let latency = start.elapsed();
        for mw in &self.middlewares {
            mw.after(req, client, &mut handled.response, latency);
        }
        handled
    }

    fn dispatch(&self, req: &ParsedRequest, client: &ClientInfo) -> Handled {
        match self.router.route(&req.method, &req.path) {
            Route::TaskList => {
                Handled::response(Response::html(200, html::render_task_list(&self.store.snapshot())))
            }
            Route::NewTaskForm => Handled::response(Response::html(200, html::render_new_task_form())),
            Route::AppendTask => self.append_task(req),
            Route::Shutdown => Handled {
                response: Response::json(200, &json!({ "message": "Server is shutting down..." })),
                shutdown: true,
            },
            Route::EchoGet => Handled::response(Response::json(
                200,
                &json!({
                    "status": "success",
                    "method": req.method.as_str(),
                    "path": req.path,
                    "message": "GET request response",
                    "client_info": client,
                }),
            )),
            Route::EchoPost => Handled::response(Response::json(
                200,
                &json!({
                    "status": "success",
                    "method": req.method.as_str(),
                    "path": req.path,
                    "message": format!("POST request data: {}", req.body_text()),
                    "client_info": client,
                }),
            )),
        }
    }

    fn append_task(&self, req: &ParsedRequest) -> Handled {
        let task = req.form_field("task").unwrap_or_default();
        if self.store.append(&task) {
            info!(task = %task, total = self.store.len(), "new task added");
        }
        // The browser flow returns to the list either way; an empty task
        // simply is not stored.
        Handled::response(Response::redirect("/tasklist"))
    }
}
