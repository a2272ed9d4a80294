use herald_derive::herald_error;

#[herald_error]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(std::io::Error),
}

fn main() {}
