fn main() {
    // Emits $OUT_DIR/built.rs; GIT_COMMIT_HASH is None outside a git checkout.
    if let Err(err) = built::write_built_file() {
        panic!("Failed to acquire build-time information: {err}");
    }
}
