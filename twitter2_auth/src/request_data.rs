use std::borrow::Cow;

use reqwest::{RequestBuilder, header::{CONTENT_TYPE, HeaderValue}};

use crate::encoding::percent_encode;

/// The parameters carried by a [`Request`](crate::client::Request), and how they are attached to
/// the underlying HTTP request.
pub trait RequestData {
    fn build_http_request(self, builder: RequestBuilder) -> reqwest::Result<reqwest::Request>;
}

pub struct QueryData<'a> {
    params: &'a [(&'a str, &'a str)],
}

impl<'a> QueryData<'a> {
    pub fn new(params: &'a [(&'a str, &'a str)]) -> Self {
        Self { params }
    }
}

impl<'a> RequestData for QueryData<'a> {
    fn build_http_request(self, builder: RequestBuilder) -> reqwest::Result<reqwest::Request> {
        builder.query(self.params).build()
    }
}

pub struct FormData<'a> {
    params: &'a [(Cow<'a, str>, Cow<'a, str>)],
}

impl<'a> FormData<'a> {
    pub fn new(params: &'a [(Cow<'a, str>, Cow<'a, str>)]) -> Self {
        Self { params }
    }
}

impl<'a> RequestData for FormData<'a> {
    fn build_http_request(self, builder: RequestBuilder) -> reqwest::Result<reqwest::Request> {
        let mut buf = String::new();
        for (key, val) in self.params {
            if !buf.is_empty() {
                buf.push('&');
            }
            buf.push_str(&percent_encode(key.as_ref()));
            buf.push('=');
            buf.push_str(&percent_encode(val.as_ref()));
        }

        builder
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .body(buf)
            .build()
    }
}
