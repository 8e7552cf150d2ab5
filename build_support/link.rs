// Linker directives for the native synthesizer engine.
// Shared by build.rs and its tests.

/// Directives to print for a build.
///
/// Nothing is linked without `native_engine`: the crate itself carries no
/// C++ code. With it, Android also needs libc++_shared so symbols like
/// __cxa_pure_virtual resolve on all ABIs (arm/x86).
pub fn link_directives(native_engine: bool, target_os: &str, lib_dir: Option<&str>) -> Vec<String> {
    let mut directives = Vec::new();
    if !native_engine {
        return directives;
    }

    if let Some(dir) = lib_dir {
        directives.push(format!("cargo:rustc-link-search=native={dir}"));
    }
    if target_os == "android" {
        directives.push("cargo:rustc-link-lib=c++_shared".to_string());
    }
    directives
}
