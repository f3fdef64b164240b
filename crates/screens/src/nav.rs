use std::fmt::Write;

/// Top-level screens reachable from the bottom navigation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Map,
    Add,
    List,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::Map, Route::Add, Route::List];

    /// Unknown paths fall back to the map.
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/add" => Route::Add,
            "/list" => Route::List,
            _ => Route::Map,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Map => "/",
            Route::Add => "/add",
            Route::List => "/list",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Route::Map => "Map",
            Route::Add => "Add",
            Route::List => "List",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Route::Map => "map",
            Route::Add => "plus-circle",
            Route::List => "list",
        }
    }
}

pub fn render(active: Route) -> String {
    let mut out = String::from("<nav class=\"navbar\">");
    for route in Route::ALL {
        let is_active = route == active;
        let _ = write!(
            out,
            "<a href=\"{}\" class=\"nav-item{}\"{}><span class=\"glyph\" data-glyph=\"{}\"></span><span>{}</span></a>",
            route.path(),
            if is_active { " active" } else { "" },
            if is_active { " aria-current=\"page\"" } else { "" },
            route.glyph(),
            route.label()
        );
    }
    out.push_str("</nav>");
    out
}
