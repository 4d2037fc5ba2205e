fn main() -> anyhow::Result<()> {
    paddock_trace::run()
}
