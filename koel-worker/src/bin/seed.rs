//! Idempotent currency catalog seeder. Upserts a fixed reference list by
//! code; re-running updates descriptive fields but never duplicates rows.

use koel_storage::currency::upsert_by_code;
use koel_types::AppConfig;
use sqlx::postgres::PgPoolOptions;

/// `(code, name, name_plural, symbol, decimal_digits)`. Covers the primary
/// and secondary cadence groups from `AppConfig`'s compiled-in defaults
/// plus a handful of other widely-traded currencies; not the full ISO 4217
/// table, but enough for the orchestrator's sweeps to have a real catalog
/// to work against out of the box.
const SEED_CURRENCIES: &[(&str, &str, &str, &str, i32)] = &[
    ("USD", "US Dollar", "US dollars", "$", 2),
    ("EUR", "Euro", "euros", "€", 2),
    ("GBP", "British Pound", "British pounds", "£", 2),
    ("JPY", "Japanese Yen", "Japanese yen", "¥", 0),
    ("CAD", "Canadian Dollar", "Canadian dollars", "$", 2),
    ("AUD", "Australian Dollar", "Australian dollars", "$", 2),
    ("CHF", "Swiss Franc", "Swiss francs", "Fr", 2),
    ("CNY", "Chinese Yuan", "Chinese yuan", "¥", 2),
    ("SGD", "Singapore Dollar", "Singapore dollars", "$", 2),
    ("HKD", "Hong Kong Dollar", "Hong Kong dollars", "$", 2),
    ("KRW", "South Korean Won", "South Korean won", "₩", 0),
    ("SEK", "Swedish Krona", "Swedish kronor", "kr", 2),
    ("NOK", "Norwegian Krone", "Norwegian kroner", "kr", 2),
    ("NZD", "New Zealand Dollar", "New Zealand dollars", "$", 2),
    ("INR", "Indian Rupee", "Indian rupees", "₹", 2),
    ("MXN", "Mexican Peso", "Mexican pesos", "$", 2),
    ("BRL", "Brazilian Real", "Brazilian reals", "R$", 2),
    ("ZAR", "South African Rand", "South African rand", "R", 2),
    ("RUB", "Russian Ruble", "Russian rubles", "₽", 2),
    ("TRY", "Turkish Lira", "Turkish lira", "₺", 2),
    ("PLN", "Polish Zloty", "Polish zloty", "zł", 2),
    ("THB", "Thai Baht", "Thai baht", "฿", 2),
    ("IDR", "Indonesian Rupiah", "Indonesian rupiah", "Rp", 2),
    ("ILS", "Israeli New Shekel", "Israeli new shekels", "₪", 2),
    ("AED", "UAE Dirham", "UAE dirhams", "د.إ", 2),
    ("SAR", "Saudi Riyal", "Saudi riyals", "﷼", 2),
    ("EGP", "Egyptian Pound", "Egyptian pounds", "£", 2),
    ("NGN", "Nigerian Naira", "Nigerian naira", "₦", 2),
    ("PHP", "Philippine Peso", "Philippine pesos", "₱", 2),
    ("VND", "Vietnamese Dong", "Vietnamese dong", "₫", 0),
    ("PKR", "Pakistani Rupee", "Pakistani rupees", "₨", 2),
    ("BDT", "Bangladeshi Taka", "Bangladeshi taka", "৳", 2),
    ("UAH", "Ukrainian Hryvnia", "Ukrainian hryvnia", "₴", 2),
    ("CZK", "Czech Koruna", "Czech korunas", "Kč", 2),
    ("HUF", "Hungarian Forint", "Hungarian forints", "Ft", 0),
    ("RON", "Romanian Leu", "Romanian lei", "lei", 2),
    ("CLP", "Chilean Peso", "Chilean pesos", "$", 0),
    ("COP", "Colombian Peso", "Colombian pesos", "$", 2),
    ("ARS", "Argentine Peso", "Argentine pesos", "$", 2),
    ("KES", "Kenyan Shilling", "Kenyan shillings", "KSh", 2),
    ("GHS", "Ghanaian Cedi", "Ghanaian cedis", "₵", 2),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    let mut conn = pool.acquire().await?;
    let mut seeded = 0;
    for (code, name, name_plural, symbol, decimal_digits) in SEED_CURRENCIES {
        upsert_by_code(&mut conn, code, name, Some(name_plural), symbol, *decimal_digits).await?;
        seeded += 1;
    }

    tracing::info!(seeded, "currency catalog seeded");
    Ok(())
}
