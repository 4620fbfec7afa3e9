/*! Integration tests for opwire.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - codec: Tests for encode/decode, round-trips and cycle handling
 * - ops: Tests for the merge algebra, the operation registry and batches
 * - entity: Tests for the entity lifecycle (mutate, flush, confirm, revert)
 * - traverse: Tests for graph traversal over entity graphs
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("opwire=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod codec;
mod helpers;
mod ops;
mod traverse;
