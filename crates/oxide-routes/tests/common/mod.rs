#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use oxide_routes::{
    ActionResult, Controller, ControllerRegistry, DispatchContext, Dispatcher, Failure, Layout,
    Params, Redirector, Response, RouteTable, RoutesConfig, Signal,
};

pub const CONFIG: &str = r#"{
    "url_root": "/site",
    "routes": [
        {
            "name": "article_slug",
            "url": "/articles/{id}-{slug}",
            "regexp": "^/articles/(\\d+)-([a-z0-9-]+)$",
            "vars": "controller=Article&action=view&id=$1&slug=$2"
        },
        {
            "name": "article_action",
            "url": "/articles/{id}/{action}",
            "regexp": "^/articles/(\\d+)/(\\w+)",
            "vars": "controller=Article&action=$2&id=$1"
        },
        {
            "name": "article",
            "url": "/articles/{id}",
            "regexp": "^/articles/(\\d+)",
            "vars": "controller=Article&action=view&id=$1",
            "extend": [
                {"requires": ["slug"], "route": "article_slug"},
                {"requires": ["action"], "route": "article_action"}
            ]
        },
        {
            "name": "home",
            "url": "/",
            "regexp": "^/$",
            "vars": "controller=Home&action=index"
        },
        {
            "name": "default",
            "url": "/{controller}/{action}",
            "regexp": "^/(\\w+)/(\\w+)",
            "vars": "controller=$1&action=$2"
        }
    ]
}"#;

pub fn config() -> RoutesConfig {
    RoutesConfig::from_json(CONFIG).unwrap_or_else(|e| panic!("Invalid fixture config: {e}"))
}

pub fn table() -> RouteTable {
    config()
        .table()
        .unwrap_or_else(|e| panic!("Invalid fixture routes: {e}"))
}

pub fn params(pairs: &[(&str, &str)]) -> Params {
    pairs.iter().copied().collect()
}

/// Shared record of everything controllers and layout did during a dispatch.
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries().iter().any(|e| e == entry)
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }
}

pub struct SiteLayout {
    pub log: Log,
}

impl Layout for SiteLayout {
    fn has_mode(&self, mode: &str) -> bool {
        matches!(mode, "index" | "print")
    }

    fn before_action(&mut self, mode: &str, params: &mut Params) -> ActionResult {
        self.log.push(format!("Layout.before {mode}"));
        if let Some(id) = params.remove("rewrite") {
            params.insert("controller", "Article");
            params.insert("action", "view");
            params.insert("id", id);
        }
        if let Some(mode) = params.remove("switch_mode") {
            params.insert("mode", mode);
        }
        if params.contains("layout_fail") {
            return Err(Failure::msg("layout hook failed").into());
        }
        Ok(())
    }

    fn attach(&mut self, _controller: Box<dyn Controller>, ctx: &DispatchContext) {
        self.log
            .push(format!("Layout.attach {}/{}", ctx.controller, ctx.action));
    }

    fn call_mode(&mut self, mode: &str) -> ActionResult {
        self.log.push(format!("Layout.{mode}"));
        Ok(())
    }

    fn render(&mut self) -> ActionResult<Response> {
        self.log.push("Layout.render");
        Ok(Response::html(self.log.entries().join("\n")))
    }
}

pub struct PageController {
    pub log: Log,
    pub with_error: bool,
}

impl Controller for PageController {
    fn has_action(&self, action: &str) -> bool {
        action == "error404" || (self.with_error && action == "error")
    }

    fn before_action(&mut self, action: &str, _params: &mut Params) -> ActionResult {
        self.log.push(format!("Page.before {action}"));
        Ok(())
    }

    fn call(&mut self, action: &str, _params: &Params) -> ActionResult {
        self.log.push(format!("Page.{action}"));
        Ok(())
    }

    fn error(&mut self, failure: &Failure) -> ActionResult {
        self.log.push(format!("Page.error: {failure}"));
        Ok(())
    }
}

pub struct ArticleController {
    pub log: Log,
    pub redirector: Redirector,
}

impl Controller for ArticleController {
    fn has_action(&self, action: &str) -> bool {
        matches!(
            action,
            "view" | "fail" | "moved" | "loop" | "gone" | "guarded" | "relay" | "secure"
        )
    }

    fn before_action(&mut self, action: &str, params: &mut Params) -> ActionResult {
        self.log.push(format!("Article.before {action}"));
        if action == "guarded" {
            return Err(Signal::redirect("Page", "error404", params.clone()));
        }
        Ok(())
    }

    fn call(&mut self, action: &str, params: &Params) -> ActionResult {
        let id = params.get("id").unwrap_or("-");
        self.log.push(format!("Article.{action} id={id}"));
        match action {
            "fail" => Err(Failure::msg("database unavailable").into()),
            "moved" => Err(Signal::redirect("Article", "view", Params::new().with("id", "1"))),
            "loop" => Err(Signal::redirect("Article", "loop", params.clone())),
            "gone" => Err(Signal::redirect("Missing", "index", Params::new())),
            "relay" => Err(Signal::redirect("Article", "fail", Params::new())),
            "secure" => Err(self.redirector.redirect("article", params, 301)),
            _ => Ok(()),
        }
    }
}

/// Builds the fixture dispatcher. `page` selects what the `Page` controller
/// provides: `None` leaves it unregistered.
pub fn dispatcher_with(log: &Log, page: Option<bool>) -> Dispatcher {
    let config = config();
    let routes = Arc::new(
        config
            .table()
            .unwrap_or_else(|e| panic!("Invalid fixture routes: {e}")),
    );
    let redirector = Redirector::new(Arc::clone(&routes), config.url_root.clone());

    let mut controllers = ControllerRegistry::new();
    let article_log = log.clone();
    controllers = controllers.register("Article", move || ArticleController {
        log: article_log.clone(),
        redirector: redirector.clone(),
    });
    if let Some(with_error) = page {
        let page_log = log.clone();
        controllers = controllers.register("Page", move || PageController {
            log: page_log.clone(),
            with_error,
        });
    }

    let layout_log = log.clone();
    Dispatcher::new(routes, move || SiteLayout {
        log: layout_log.clone(),
    })
    .url_root(config.url_root)
    .controllers(controllers)
}

pub fn dispatcher(log: &Log) -> Dispatcher {
    dispatcher_with(log, Some(true))
}
