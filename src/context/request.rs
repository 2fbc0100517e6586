use std::collections::HashMap;

use actix_web::HttpRequest;

/// The parts of an HTTP request the authenticators look at.
///
/// Header names are matched case-insensitively. Form fields are only
/// present when the web layer parsed a submitted form body.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    headers: HashMap<String, String>,
    form: HashMap<String, String>,
}

impl Request {
    pub fn new(method: &str) -> Self {
        Self {
            method: method.to_lowercase(),
            headers: HashMap::new(),
            form: HashMap::new(),
        }
    }

    /// Copies method and headers out of an actix-web request. Headers whose
    /// value is not visible ASCII are skipped.
    pub fn from_http(req: &HttpRequest) -> Self {
        let mut headers = HashMap::with_capacity(req.headers().len());
        for (name, value) in req.headers().iter() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_lowercase(), value.to_string());
            }
        }
        Self {
            method: req.method().as_str().to_lowercase(),
            headers,
            form: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn with_form<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.form
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[inline]
    pub fn is_post(&self) -> bool {
        self.method == "post"
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|v| v.as_str())
    }

    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn test_from_http() {
        let http = TestRequest::post()
            .uri("/songs")
            .insert_header(("Authorization", "Bearer abc"))
            .insert_header(("X-Trace", "1"))
            .to_http_request();

        let req = Request::from_http(&http);
        assert_eq!(req.method(), "post");
        assert!(req.is_post());
        assert_eq!(req.header("authorization"), Some("Bearer abc"));
        assert_eq!(req.header("AUTHORIZATION"), Some("Bearer abc"));
        assert_eq!(req.header("x-trace"), Some("1"));
        assert_eq!(req.header("cookie"), None);
        assert_eq!(req.form_value("username"), None);
    }

    #[test]
    fn test_form() {
        let req = Request::new("POST").with_form([("username", "stephen"), ("password", "hawking")]);
        assert!(req.is_post());
        assert_eq!(req.form_value("username"), Some("stephen"));
        assert_eq!(req.form_value("password"), Some("hawking"));
        assert_eq!(req.form_value("Username"), None);

        let req = Request::new("get").with_header("Accept", "text/html");
        assert!(!req.is_post());
        assert_eq!(req.header("accept"), Some("text/html"));
    }
}
