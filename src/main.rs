fn main() -> std::process::ExitCode {
    heartscan_lib::run()
}
