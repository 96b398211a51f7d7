pub mod crawl;
pub mod report;

use colored::Colorize;

pub fn print_banner() {
    println!();
    println!("{}", "  ╔╦╗╔═╗╔═╗╔═╗╦ ╦╔═╗╔═╗╔═╗".bright_cyan().bold());
    println!("{}", "   ║ ╠═╣║ ╦╚═╗║║║║╣ ║╣ ╠═╝".bright_cyan().bold());
    println!("{}", "   ╩ ╩ ╩╚═╝╚═╝╚╩╝╚═╝╚═╝╩  ".bright_cyan().bold());
    println!(
        "  {} {}",
        "tag manager audit crawler".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!();
}
