use herald_derive::herald_error;

#[herald_error]
pub enum ReplayError {
    #[error("IO error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
}

fn main() {}
