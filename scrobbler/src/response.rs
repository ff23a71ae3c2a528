use crate::errors::ScrobbleError;
use roxmltree::Document;
use std::fmt;

const ROOT_ELEMENT: &str = "lfm";
const STATUS_ATTRIBUTE: &str = "status";
const STATUS_OK: &str = "ok";

/// Error details the upstream attaches to a `failed` reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamError {
    pub code: Option<u32>,
    pub message: String,
}

/// The `status` attribute of the upstream `lfm` element, kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrobbleStatus {
    status: String,
    error: Option<UpstreamError>,
}

impl ScrobbleStatus {
    pub fn as_str(&self) -> &str {
        &self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    pub fn error(&self) -> Option<&UpstreamError> {
        self.error.as_ref()
    }

    pub fn into_string(self) -> String {
        self.status
    }
}

impl fmt::Display for ScrobbleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status)
    }
}

/// Extracts `<lfm status="...">` from an upstream reply body.
pub fn parse_status(body: &str) -> Result<ScrobbleStatus, ScrobbleError> {
    let doc = Document::parse(body).map_err(|e| ScrobbleError::MalformedResponse(e.to_string()))?;

    let root = doc.root_element();
    if root.tag_name().name() != ROOT_ELEMENT {
        return Err(ScrobbleError::MalformedResponse(format!(
            "expected <{ROOT_ELEMENT}> root element, found <{}>",
            root.tag_name().name()
        )));
    }

    let status = root.attribute(STATUS_ATTRIBUTE).ok_or_else(|| {
        ScrobbleError::MalformedResponse(format!(
            "<{ROOT_ELEMENT}> has no {STATUS_ATTRIBUTE} attribute"
        ))
    })?;

    let error = root
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "error")
        .map(|node| UpstreamError {
            code: node.attribute("code").and_then(|c| c.trim().parse().ok()),
            message: node.text().unwrap_or_default().trim().to_string(),
        });

    Ok(ScrobbleStatus {
        status: status.to_string(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_status() {
        let status = parse_status(r#"<lfm status="ok"><scrobbles/></lfm>"#).unwrap();
        assert_eq!(status.as_str(), "ok");
        assert!(status.is_ok());
        assert!(status.error().is_none());
    }

    #[test]
    fn test_failed_status() {
        let status =
            parse_status(r#"<lfm status="failed"><error code="9">message</error></lfm>"#).unwrap();
        assert_eq!(status.as_str(), "failed");
        assert!(!status.is_ok());
        assert_eq!(
            status.error(),
            Some(&UpstreamError {
                code: Some(9),
                message: "message".into(),
            })
        );
        assert_eq!(status.to_string(), "failed");
    }

    #[test]
    fn test_unknown_status_passed_through() {
        let body = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<lfm status=\"pending\">\n</lfm>\n";
        let status = parse_status(body).unwrap();
        assert_eq!(status.into_string(), "pending");
    }

    #[test]
    fn test_malformed_responses() {
        // Not XML
        assert!(matches!(
            parse_status("Service Temporarily Unavailable"),
            Err(ScrobbleError::MalformedResponse(_))
        ));

        // Empty body
        assert!(matches!(
            parse_status(""),
            Err(ScrobbleError::MalformedResponse(_))
        ));

        // Unclosed element
        assert!(matches!(
            parse_status(r#"<lfm status="ok">"#),
            Err(ScrobbleError::MalformedResponse(_))
        ));

        // Valid XML without lfm
        assert!(matches!(
            parse_status(r#"<html><body>502</body></html>"#),
            Err(ScrobbleError::MalformedResponse(_))
        ));

        // lfm without status
        assert!(matches!(
            parse_status(r#"<lfm><scrobbles/></lfm>"#),
            Err(ScrobbleError::MalformedResponse(_))
        ));
    }
}
