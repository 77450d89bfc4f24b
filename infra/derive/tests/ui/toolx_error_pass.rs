use std::borrow::Cow;
use toolx_derive::toolx_error;

#[toolx_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err: DemoError = std::io::Error::other("boom").into();
    let _ = err.to_string();

    let with_context: Result<(), DemoError> =
        Err(std::io::Error::other("boom")).context("opening the demo file");
    assert!(with_context.unwrap_err().to_string().contains("opening the demo file"));

    let internal: DemoError = "plain message".into();
    let _ = internal.to_string();
}
