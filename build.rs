fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // ESP-IDF builds need the sysenv exported for esp-idf-sys linking.
    // Host builds have nothing to generate.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
