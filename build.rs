fn main() {
    // Host builds need nothing from the build script; the ESP-IDF target
    // pulls its toolchain environment in through embuild.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
