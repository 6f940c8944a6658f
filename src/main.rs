fn main() -> anyhow::Result<()> {
    notewell::cli::run()
}
