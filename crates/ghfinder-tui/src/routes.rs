// Static routing table: path -> view
//
//   /              home (search)
//   /about         about
//   /user/{login}  profile + repositories
//   anything else  not found

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Home,
    About,
    User(String),
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let segments: Vec<&str> = trimmed
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["about"] => Route::About,
            ["user", login] => Route::User((*login).to_string()),
            _ => Route::NotFound(trimmed.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::About => "/about".to_string(),
            Route::User(login) => format!("/user/{}", login),
            Route::NotFound(path) => path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/about"), Route::About);
        assert_eq!(Route::parse("/about/"), Route::About);
        assert_eq!(Route::parse("/user/octocat"), Route::User("octocat".to_string()));
    }

    #[test]
    fn test_unknown_paths_are_not_found() {
        assert_eq!(Route::parse("/nope"), Route::NotFound("/nope".to_string()));
        assert_eq!(Route::parse("/user"), Route::NotFound("/user".to_string()));
    }

    #[test]
    fn test_path_roundtrip_for_user() {
        let route = Route::User("octocat".to_string());
        assert_eq!(Route::parse(&route.path()), route);
    }
}
