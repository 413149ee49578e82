fn main() {
    // Service stubs are generated from Rust-side message definitions
    // (src/messages.rs), so no protoc toolchain is needed at build time.
    let login = tonic_build::manual::Method::builder()
        .name("login")
        .route_name("Login")
        .input_type("crate::messages::LoginRequest")
        .output_type("crate::messages::LoginResponse")
        .codec_path("tonic::codec::ProstCodec")
        .build();

    let user_service = tonic_build::manual::Service::builder()
        .name("UserService")
        .package("user.v1")
        .method(login)
        .build();

    tonic_build::manual::Builder::new().compile(&[user_service]);

    println!("cargo:rerun-if-changed=build.rs");
}
