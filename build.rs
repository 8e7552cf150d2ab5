// Build script for linking the native synthesizer engine
//
// With the `native_engine` feature the crate binds to libaudiosynthesizer
// through its C ABI. Point AUDIOSYNTH_LIB_DIR at the directory holding the
// built library when it is not on the default linker path.

#[path = "build_support/link.rs"]
mod link;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=build_support/link.rs");
    println!("cargo:rerun-if-env-changed=AUDIOSYNTH_LIB_DIR");

    let native_engine = std::env::var_os("CARGO_FEATURE_NATIVE_ENGINE").is_some();
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let lib_dir = std::env::var("AUDIOSYNTH_LIB_DIR").ok();

    for directive in link::link_directives(native_engine, &target_os, lib_dir.as_deref()) {
        println!("{directive}");
    }
}
