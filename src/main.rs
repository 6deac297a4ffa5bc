mod cli;

fn main() -> crosslist::Result<()> {
    cli::run()
}
