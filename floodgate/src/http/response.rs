//! Macros for building responses

/// Produces an HTTP response from a status code and an [`HttpBody`],
/// with optional static headers.
///
/// # Examples
/// ```no_run
/// use floodgate::{response, HttpBody, http::StatusCode};
///
/// response!(StatusCode::OK, HttpBody::empty());
/// response!(
///     StatusCode::OK,
///     HttpBody::full("ok");
///     [(floodgate::headers::CONTENT_TYPE, "text/plain; charset=utf-8")]
/// );
/// ```
///
/// [`HttpBody`]: crate::HttpBody
#[macro_export]
macro_rules! response {
    ($status:expr, $body:expr) => {
        $crate::response!($status, $body; [])
    };

    ($status:expr, $body:expr; [ $( ($key:expr, $value:expr) ),* $(,)? ]) => {{
        let mut response = $crate::http::HttpResponse::new($body);
        *response.status_mut() = $status;
        $(
            response.headers_mut().insert(
                $key,
                $crate::headers::HeaderValue::from_static($value)
            );
        )*
        ::std::result::Result::Ok::<_, $crate::error::Error>(response)
    }};
}

/// Produces a response with the specified HTTP status code.
///
/// Two modes:
/// - **Empty response**: `status!(404)`
/// - **Plain text (UTF-8)**: `status!(429, "Too many requests")`
///   (works for any value via `ToString`)
///
/// # Examples
/// ```no_run
/// use floodgate::status;
///
/// status!(404);
/// status!(429, "Too many requests");
/// ```
#[macro_export]
macro_rules! status {
    ($status:expr) => {
        $crate::response!(
            $crate::http::StatusCode::from_u16($status).unwrap_or($crate::http::StatusCode::OK),
            $crate::http::HttpBody::empty()
        )
    };

    ($status:expr, $body:expr) => {
        $crate::response!(
            $crate::http::StatusCode::from_u16($status).unwrap_or($crate::http::StatusCode::OK),
            $crate::http::HttpBody::full($body.to_string());
            [ ($crate::headers::CONTENT_TYPE, "text/plain; charset=utf-8") ]
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::http::StatusCode;

    #[test]
    fn it_builds_an_empty_status_response() {
        let response = status!(404).unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn it_builds_a_text_status_response() {
        let response = status!(429, "Too many requests").unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn it_falls_back_to_ok_for_an_invalid_code() {
        let response = status!(13).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn it_carries_the_text_body() {
        let response = status!(200, "Hello, World!").unwrap();

        let content = response.into_body().collect_bytes().await.unwrap();

        assert_eq!(content, "Hello, World!");
    }
}
