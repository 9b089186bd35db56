fn main() -> anyhow::Result<()> {
    alpaca_viewer::start()
}
