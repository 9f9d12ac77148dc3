//! Blog command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use quill_core::domain::blog::Blog;
use uuid::Uuid;

use crate::config::Config;

/// Blog subcommands
#[derive(Subcommand)]
pub enum BlogCommands {
    /// List the articles generated for a batch
    List {
        /// Batch ID
        batch_id: String,

        /// Print the full article body
        #[arg(long)]
        full: bool,
    },
}

/// Handle blog commands
pub async fn handle_blog_command(command: BlogCommands, config: &Config) -> Result<()> {
    match command {
        BlogCommands::List { batch_id, full } => {
            let batch_id = Uuid::parse_str(&batch_id).context("Invalid batch ID")?;
            let blogs = config.client().list_blogs(batch_id).await?;

            if blogs.is_empty() {
                println!("{}", "No blogs found.".yellow());
                return Ok(());
            }

            println!("{}", format!("Found {} blog(s):", blogs.len()).bold());
            println!();
            for blog in &blogs {
                print_blog(blog, full);
            }

            Ok(())
        }
    }
}

fn print_blog(blog: &Blog, full: bool) {
    println!("  {} {}", "▸".cyan(), blog.title.bold());
    println!("    Keyword:  {}", blog.keyword);
    println!("    Chars:    {}", blog.word_count);
    println!("    Score:    {}", format_score(blog.seo_score));
    println!("    Links:    {}", blog.internal_links.len());
    for link in &blog.internal_links {
        println!("      {}", link.dimmed());
    }
    println!("    Meta:     {}", blog.meta_description.dimmed());

    if full {
        println!("{}", "─".repeat(80).dimmed());
        println!("{}", blog.content);
        println!("{}", "─".repeat(80).dimmed());
    }
    println!();
}

fn format_score(score: Option<i32>) -> ColoredString {
    match score {
        Some(s) if s >= 60 => format!("{}%", s).green(),
        Some(s) => format!("{}%", s).yellow(),
        None => "unscored".dimmed(),
    }
}
