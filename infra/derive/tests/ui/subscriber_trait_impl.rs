use herald_derive::subscriber;

struct Audit;

#[subscriber]
impl Clone for Audit {
    fn clone(&self) -> Self {
        Audit
    }
}

fn main() {
    let _ = Audit;
}
