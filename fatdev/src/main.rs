mod application;
mod presentation;

fn main() -> fat_core::Result<()> {
    application::run()
}
