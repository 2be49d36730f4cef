pub struct FileSizeUtils;

impl FileSizeUtils {
    /// Binary units, two decimals above bytes: `1536` → `"1.50 KB"`.
    pub fn format_size(size: u64) -> String {
        const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
        let mut value = size as f64;
        let mut unit = 0;

        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }

        if unit == 0 {
            format!("{} {}", size, UNITS[0])
        } else {
            format!("{:.2} {}", value, UNITS[unit])
        }
    }

    pub fn describe_selection(count: usize, total: u64) -> String {
        let noun = if count == 1 { "document" } else { "documents" };
        format!("{} {} ({})", count, noun, Self::format_size(total))
    }
}
