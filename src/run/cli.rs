use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::db::{CategorySortField, Database, PageRequest, ProductSortField, SortDir};
use crate::models::{Category, Product};

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    match args[1].as_str() {
        "categories" => cli_categories(&args[2..], db),
        "category" => cli_category(&args[2..], db),
        "products" => cli_products(&args[2..], db),
        "product" => cli_product(&args[2..], db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("stockbook {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Stockbook — local catalog manager for products and categories");
    println!();
    println!("Usage: stockbook <command>");
    println!();
    println!("Commands:");
    println!("  categories                    List categories (with product counts)");
    println!("  category add <name>           Create a category");
    println!("  category rename <id> <name>   Rename a category");
    println!("  category rm <id>              Delete a category (fails while products reference it)");
    println!("  products                      List products");
    println!("    --category <id>             Only products in this category");
    println!("  product add <code> <name> <price> --category <id|name>");
    println!("  product set <id>              Edit a product");
    println!("    --code / --name / --price / --category");
    println!("  product show <id>             Show one product");
    println!("  product rm <id>               Delete a product");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Listing flags: --search <term> --page <n> --size <n> --sort <field> --dir <asc|desc>");
}

// ── Categories ───────────────────────────────────────────────

fn cli_categories(args: &[String], db: &mut Database) -> Result<()> {
    let req = parse_page(args, CategorySortField::parse);
    let page = match flag_value(args, "--search") {
        Some(term) => db.search_categories(Some(term), &req)?,
        None => db.list_categories(&req)?,
    };

    if page.is_empty() {
        println!("No categories");
        return Ok(());
    }

    println!("{:<6} {:<28} Products", "ID", "Name");
    println!("{}", "─".repeat(44));
    for cat in &page.items {
        let count = match cat.id {
            Some(id) => db.category_product_count(id)?,
            None => 0,
        };
        println!("{:<6} {:<28} {count}", cat.id.unwrap_or(0), cat.name);
    }
    print_page_footer(page.page, page.total_pages, page.total_items);
    Ok(())
}

fn cli_category(args: &[String], db: &mut Database) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("add") => {
            let name = args[1..].join(" ");
            if name.is_empty() {
                anyhow::bail!("Usage: stockbook category add <name>");
            }
            let saved = db.save_category(&Category::new(name))?;
            println!("Created category '{}' (id {})", saved.name, saved.id.unwrap_or(0));
            Ok(())
        }
        Some("rename") => {
            if args.len() < 3 {
                anyhow::bail!("Usage: stockbook category rename <id> <name>");
            }
            let id = parse_id(&args[1])?;
            let mut cat = db
                .get_category_by_id(id)?
                .ok_or_else(|| anyhow::anyhow!("Category {id} not found"))?;
            cat.name = args[2..].join(" ");
            let saved = db.save_category(&cat)?;
            println!("Renamed category {id} to '{}'", saved.name);
            Ok(())
        }
        Some("rm") => {
            if args.len() < 2 {
                anyhow::bail!("Usage: stockbook category rm <id>");
            }
            let id = parse_id(&args[1])?;
            db.delete_category(id)?;
            println!("Deleted category {id}");
            Ok(())
        }
        _ => anyhow::bail!("Usage: stockbook category <add|rename|rm> ..."),
    }
}

// ── Products ─────────────────────────────────────────────────

fn cli_products(args: &[String], db: &mut Database) -> Result<()> {
    let req = parse_page(args, ProductSortField::parse);
    let term = flag_value(args, "--search");
    let category_id = flag_value(args, "--category")
        .map(|v| v.parse::<i64>())
        .transpose()
        .context("--category expects a numeric id")?;

    let page = match (category_id, term) {
        (Some(cid), Some(_)) => db.search_products_in_category(cid, term, &req)?,
        (Some(cid), None) => db.products_by_category(cid, &req)?,
        (None, Some(_)) => db.search_products(term, &req)?,
        (None, None) => db.list_products(&req)?,
    };

    if page.is_empty() {
        println!("No products");
        return Ok(());
    }

    println!(
        "{:<6} {:<12} {:<28} {:>10}  Category",
        "ID", "Code", "Name", "Price"
    );
    println!("{}", "─".repeat(72));
    for p in &page.items {
        println!(
            "{:<6} {:<12} {:<28} {:>10}  {}",
            p.id.unwrap_or(0),
            p.code,
            p.name,
            format!("${:.2}", p.price),
            p.category.name,
        );
    }
    print_page_footer(page.page, page.total_pages, page.total_items);
    Ok(())
}

fn cli_product(args: &[String], db: &mut Database) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("add") => {
            if args.len() < 4 {
                anyhow::bail!(
                    "Usage: stockbook product add <code> <name> <price> --category <id|name>"
                );
            }
            let price = Decimal::from_str(&args[3])
                .with_context(|| format!("Invalid price: {}", args[3]))?;
            let category = resolve_category(flag_value(args, "--category"), db)?;
            let product = Product::new(args[1].clone(), args[2].clone(), price, category);
            let saved = db.save_product(&product)?;
            println!("Created product {} (id {})", saved, saved.id.unwrap_or(0));
            Ok(())
        }
        Some("set") => {
            if args.len() < 2 {
                anyhow::bail!("Usage: stockbook product set <id> [--code] [--name] [--price] [--category]");
            }
            let id = parse_id(&args[1])?;
            let mut product = db
                .get_product_by_id(id)?
                .ok_or_else(|| anyhow::anyhow!("Product {id} not found"))?;
            if let Some(code) = flag_value(args, "--code") {
                product.code = code.to_string();
            }
            if let Some(name) = flag_value(args, "--name") {
                product.name = name.to_string();
            }
            if let Some(price) = flag_value(args, "--price") {
                product.price =
                    Decimal::from_str(price).with_context(|| format!("Invalid price: {price}"))?;
            }
            if flag_value(args, "--category").is_some() {
                product.category = resolve_category(flag_value(args, "--category"), db)?;
            }
            let saved = db.save_product(&product)?;
            println!("Updated product {saved}");
            Ok(())
        }
        Some("show") => {
            if args.len() < 2 {
                anyhow::bail!("Usage: stockbook product show <id>");
            }
            let id = parse_id(&args[1])?;
            match db.get_product_by_id(id)? {
                Some(p) => {
                    println!("Product {id}");
                    println!("  Code:     {}", p.code);
                    println!("  Name:     {}", p.name);
                    println!("  Price:    ${:.2}", p.price);
                    println!(
                        "  Category: {} (id {})",
                        p.category.name,
                        p.category.id.unwrap_or(0)
                    );
                }
                None => println!("Product {id} not found"),
            }
            Ok(())
        }
        Some("rm") => {
            if args.len() < 2 {
                anyhow::bail!("Usage: stockbook product rm <id>");
            }
            let id = parse_id(&args[1])?;
            db.delete_product(id)?;
            println!("Deleted product {id}");
            Ok(())
        }
        _ => anyhow::bail!("Usage: stockbook product <add|set|show|rm> ..."),
    }
}

// ── Helpers ──────────────────────────────────────────────────

fn resolve_category(arg: Option<&str>, db: &Database) -> Result<Category> {
    let arg = arg.ok_or_else(|| anyhow::anyhow!("--category <id|name> is required"))?;
    if let Ok(id) = arg.parse::<i64>() {
        return db
            .get_category_by_id(id)?
            .ok_or_else(|| anyhow::anyhow!("Category {id} not found"));
    }
    let page = db.search_categories(
        Some(arg),
        &PageRequest::new(0, 50, CategorySortField::Name, SortDir::Asc),
    )?;
    Category::find_by_name(&page.items, arg)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Category '{arg}' not found"))
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn parse_page<S: Default>(args: &[String], parse_sort: fn(&str) -> S) -> PageRequest<S> {
    let page = flag_value(args, "--page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let size = flag_value(args, "--size")
        .and_then(|v| v.parse().ok())
        .unwrap_or(20);
    let sort_by = flag_value(args, "--sort")
        .map(parse_sort)
        .unwrap_or_default();
    let dir = flag_value(args, "--dir")
        .map(SortDir::parse)
        .unwrap_or_default();
    PageRequest::new(page, size, sort_by, dir)
}

fn parse_id(arg: &str) -> Result<i64> {
    arg.parse()
        .with_context(|| format!("Expected a numeric id, got '{arg}'"))
}

fn print_page_footer(page: u32, total_pages: u32, total_items: u64) {
    println!();
    println!(
        "page {} of {} ({total_items} total)",
        page + 1,
        total_pages.max(1)
    );
}
