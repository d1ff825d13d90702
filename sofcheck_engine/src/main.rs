extern crate sofcheck_engine;

use sofcheck_engine::engine::UciClient;

fn main() {
    UciClient::new().run();
}
