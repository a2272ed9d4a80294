use herald_derive::herald_error;
use std::borrow::Cow;

#[herald_error]
pub enum ReplayError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn open_journal() -> Result<()> {
    std::fs::File::open("/nonexistent/journal").context("Opening journal")?;
    Ok(())
}

fn main() {
    let err = open_journal().unwrap_err();
    assert_eq!(err.context(), Some("Opening journal"));

    let internal: ReplayError = "broken invariant".into();
    assert!(internal.context().is_none());
    assert_eq!(internal.to_string(), "Internal error: broken invariant");
}
