//! Binary entrypoint for the `ribbitx` CLI.

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = ribbitx_cli::run().await;
    std::process::exit(exit_code);
}
