fn main() -> anyhow::Result<()> {
    archviz::run()
}
