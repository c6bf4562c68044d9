use colored::*;

use crate::modes::ModeReport;

const RULE: &str = "============================================================";

pub fn print_query(query: &str) {
    println!("\n{} {}", "USER:".bold(), query);
    println!("{}", "-".repeat(50));
}

pub fn print_answer(answer: Option<&str>) {
    match answer {
        Some(answer) => println!("\n{} {}", "AGENT:".green().bold(), answer),
        None => println!(
            "\n{}",
            "Turn budget exhausted before the agent produced a final answer.".yellow()
        ),
    }
}

pub fn print_report(report: &ModeReport) {
    println!("\n{}", RULE);
    println!(" {} TOKEN USAGE:", report.mode);
    println!("   Total Turns: {}", report.turns);
    println!("   Tool Calls: {}", report.dispatches);
    println!("   Input Tokens: {}", group_digits(report.counters.prompt_tokens));
    println!(
        "   Output Tokens: {}",
        group_digits(report.counters.completion_tokens)
    );
    println!("   Total Tokens: {}", group_digits(report.counters.total()));
    println!("   Tools in Context: {}", report.tools_in_context);
    println!("{}", RULE);
}

pub fn print_comparison(left: &ModeReport, right: &ModeReport) {
    println!("\n{}", RULE);
    println!(" FINAL COMPARISON");
    println!("{}", RULE);
    println!(
        "   {:<12} {:>8} {:>10} {:>10} {:>10}",
        "mode", "turns", "input", "output", "total"
    );
    for report in [left, right] {
        println!(
            "   {:<12} {:>8} {:>10} {:>10} {:>10}",
            report.mode.to_lowercase(),
            report.turns,
            group_digits(report.counters.prompt_tokens),
            group_digits(report.counters.completion_tokens),
            group_digits(report.counters.total()),
        );
    }

    let (lower, higher) = if left.counters.total() <= right.counters.total() {
        (left, right)
    } else {
        (right, left)
    };
    if higher.counters.total() > 0 {
        let saved = higher.counters.total() - lower.counters.total();
        let percent = saved as f64 / higher.counters.total() as f64 * 100.0;
        println!(
            "\n   {} used {} fewer tokens than {} ({:.1}% less)",
            lower.mode.to_lowercase().bold(),
            group_digits(saved),
            higher.mode.to_lowercase(),
            percent
        );
    }
    println!("{}", RULE);
}

/// 13023 -> "13,023"
pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1000), "1,000");
        assert_eq!(group_digits(13023), "13,023");
        assert_eq!(group_digits(1234567), "1,234,567");
    }
}
