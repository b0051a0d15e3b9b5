use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    viewer_debug::cli::main()
}
