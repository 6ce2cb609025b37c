// build.rs

fn main() {
    #[cfg(feature = "grpc")]
    {
        tonic_build::configure()
            .build_server(true)
            .build_client(true)
            .compile(&["proto/kbm.proto"], &["proto"])
            .unwrap_or_else(|e| panic!("Failed to compile protos: {}", e));
    }

    println!("cargo:rerun-if-changed=proto");
}
