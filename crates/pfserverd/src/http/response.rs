//! Error pages and HTML escaping.

use std::borrow::Cow;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use hyper::ext::ReasonPhrase;

/// Reason strings used by the router and listing renderer.
pub(crate) const FILE_NOT_FOUND: &str = "File not found";
pub(crate) const NO_FILES_FOUND: &str = "No files found";
pub(crate) const NO_SUCH_DIRECTORY: &str = "No such directory";
pub(crate) const UNSUPPORTED_METHOD: &str = "Unsupported method";

/// An HTML error page whose status-line reason phrase is `message`.
pub(crate) fn error_response(status: StatusCode, message: &'static str) -> Response {
    let mut response = (status, Html(error_page(status, message))).into_response();
    response
        .extensions_mut()
        .insert(ReasonPhrase::from_static(message.as_bytes()));
    response
}

fn error_page(status: StatusCode, message: &str) -> String {
    let code = status.as_u16();
    let message = escape_html(message);
    format!(
        "<!DOCTYPE HTML>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Error response</title>\n\
         </head>\n\
         <body>\n\
         <h1>Error response</h1>\n\
         <p>Error code: {code}</p>\n\
         <p>Message: {message}.</p>\n\
         </body>\n\
         </html>\n"
    )
}

/// Escapes the characters that would otherwise break out of HTML text or a
/// double-quoted attribute.
pub(crate) fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    let mut escaped = String::with_capacity(input.len() + 8);
    for character in input.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}
