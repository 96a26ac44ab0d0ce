use std::fmt;

use url::Url;
use uuid::Uuid;

/// Client-side screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Create,
    /// What the recipient opens from a shared link.
    View(Uuid),
    /// The recipient's screen as seen by the sender; decline is disabled.
    Preview(Uuid),
    Share(Uuid),
    Status(Uuid),
}

/// One entry in the floating navigation shown on wrapped routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub route: Route,
    pub active: bool,
}

impl Route {
    pub fn parse(path: &str) -> Option<Self> {
        if !path.starts_with('/') {
            return None;
        }
        let trimmed = path.trim_end_matches('/');
        let mut segments = trimmed.split('/').skip(1);

        let head = segments.next().unwrap_or("");
        let id = segments.next();
        if segments.next().is_some() {
            return None;
        }

        match (head, id) {
            ("", None) => Some(Self::Home),
            ("create", None) => Some(Self::Create),
            (kind, Some(raw)) => {
                let id = raw.parse().ok()?;
                match kind {
                    "view" => Some(Self::View(id)),
                    "preview" => Some(Self::Preview(id)),
                    "share" => Some(Self::Share(id)),
                    "status" => Some(Self::Status(id)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub fn request_id(&self) -> Option<Uuid> {
        match self {
            Self::View(id) | Self::Preview(id) | Self::Share(id) | Self::Status(id) => Some(*id),
            Self::Home | Self::Create => None,
        }
    }

    /// Sender-side screens carry the floating Status/Share/Preview navigation.
    pub fn is_wrapped(&self) -> bool {
        matches!(self, Self::Preview(_) | Self::Share(_) | Self::Status(_))
    }

    pub fn is_preview(&self) -> bool {
        matches!(self, Self::Preview(_))
    }

    pub fn nav_items(&self) -> Vec<NavItem> {
        let Some(id) = self.request_id().filter(|_| self.is_wrapped()) else {
            return Vec::new();
        };

        [
            ("Status", Self::Status(id)),
            ("Share", Self::Share(id)),
            ("Preview", Self::Preview(id)),
        ]
        .into_iter()
        .map(|(label, route)| NavItem {
            label,
            route,
            active: route == *self,
        })
        .collect()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "/"),
            Self::Create => write!(f, "/create"),
            Self::View(id) => write!(f, "/view/{id}"),
            Self::Preview(id) => write!(f, "/preview/{id}"),
            Self::Share(id) => write!(f, "/share/{id}"),
            Self::Status(id) => write!(f, "/status/{id}"),
        }
    }
}

/// The link a recipient opens: `{site origin}/view/{id}`.
pub fn canonical_view_url(site: &Url, id: Uuid) -> Url {
    let mut url = site.clone();
    url.set_path(&Route::View(id).to_string());
    url.set_query(None);
    url.set_fragment(None);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip() {
        let id = Uuid::new_v4();
        for route in [
            Route::Home,
            Route::Create,
            Route::View(id),
            Route::Preview(id),
            Route::Share(id),
            Route::Status(id),
        ] {
            assert_eq!(Route::parse(&route.to_string()), Some(route));
        }
    }

    #[test]
    fn rejects_unknown_paths() {
        assert_eq!(Route::parse("/view/not-a-uuid"), None);
        assert_eq!(Route::parse("/edit/00000000-0000-0000-0000-000000000001"), None);
        assert_eq!(Route::parse("/create/extra"), None);
        assert_eq!(Route::parse("/view"), None);
    }

    #[test]
    fn trailing_slash_tolerated() {
        assert_eq!(Route::parse("/create/"), Some(Route::Create));
    }

    #[test]
    fn nav_only_on_wrapped_routes() {
        let id = Uuid::new_v4();
        assert!(Route::View(id).nav_items().is_empty());

        let items = Route::Share(id).nav_items();
        let labels: Vec<_> = items.iter().map(|i| i.label).collect();
        assert_eq!(labels, ["Status", "Share", "Preview"]);
        assert!(items.iter().filter(|i| i.active).all(|i| i.route == Route::Share(id)));
    }

    #[test]
    fn view_url_uses_site_origin() {
        let id = Uuid::nil();
        let site = Url::parse("https://valentine.example/create?x=1").unwrap();
        assert_eq!(
            canonical_view_url(&site, id).as_str(),
            "https://valentine.example/view/00000000-0000-0000-0000-000000000000"
        );
    }
}
