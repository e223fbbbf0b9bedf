/// HTTP method override for HTML forms
///
/// Browsers only submit forms as GET or POST, while the route table uses
/// PATCH for updates and DELETE for destroys. Forms post to the resource
/// path with a `_method` query parameter (e.g. `/tasks/:id?_method=patch`)
/// and this middleware rewrites the method before routing.
///
/// Only POST requests are rewritten, and only to PATCH or DELETE; anything
/// else passes through untouched.
use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::Response,
};

/// Middleware rewriting `POST` to the method named by `_method`
pub async fn method_override(mut req: Request, next: Next) -> Response {
    if req.method() == Method::POST {
        if let Some(method) = override_from_query(req.uri().query()) {
            *req.method_mut() = method;
        }
    }
    next.run(req).await
}

fn override_from_query(query: Option<&str>) -> Option<Method> {
    let query = query?;
    for pair in query.split('&') {
        let mut parts = pair.splitn(2, '=');
        if parts.next() == Some("_method") {
            return match parts.next() {
                Some(v) if v.eq_ignore_ascii_case("patch") => Some(Method::PATCH),
                Some(v) if v.eq_ignore_ascii_case("delete") => Some(Method::DELETE),
                _ => None,
            };
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_patch() {
        assert_eq!(
            override_from_query(Some("_method=patch")),
            Some(Method::PATCH)
        );
    }

    #[test]
    fn test_override_delete() {
        assert_eq!(
            override_from_query(Some("_method=delete")),
            Some(Method::DELETE)
        );
    }

    #[test]
    fn test_override_ignores_other_methods() {
        // Only PATCH and DELETE may be smuggled through a form post
        assert_eq!(override_from_query(Some("_method=get")), None);
        assert_eq!(override_from_query(Some("_method=put")), None);
    }

    #[test]
    fn test_override_absent() {
        assert_eq!(override_from_query(None), None);
        assert_eq!(override_from_query(Some("page=2")), None);
    }

    #[test]
    fn test_override_among_other_params() {
        assert_eq!(
            override_from_query(Some("page=2&_method=delete")),
            Some(Method::DELETE)
        );
    }
}
