fn main() {
    // Generate UniFFI bindings
    uniffi::generate_scaffolding("src/whatsfly_core.udl").unwrap();

    // Rerun if UDL file changes
    println!("cargo:rerun-if-changed=src/whatsfly_core.udl");
}
