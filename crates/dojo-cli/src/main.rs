mod arena;
mod command;

fn main() -> anyhow::Result<()> {
    command::run()
}
