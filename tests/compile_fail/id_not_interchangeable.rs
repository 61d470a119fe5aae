// ABOUTME: Compile-fail test verifying ImplementationId and TxHash are not interchangeable.
// ABOUTME: This test should fail to compile, validating type safety.

use proxyforge::types::{ImplementationId, TxHash};

fn takes_implementation(_id: ImplementationId) {}

fn main() {
    let tx = TxHash::new("0xbeef");
    takes_implementation(tx); // ERROR: expected ImplementationId, found TxHash
}
