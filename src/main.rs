fn main() -> std::process::ExitCode {
    s3explorer_lib::run()
}
