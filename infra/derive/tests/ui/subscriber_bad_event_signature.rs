use herald_derive::subscriber;

struct Orders;

#[subscriber]
impl Orders {
    #[event("orders.created")]
    fn created(&self, order: String) {}
}

fn main() {
    let _ = Orders;
}
