fn main() -> std::process::ExitCode {
    codegen_assistant_lib::run()
}
