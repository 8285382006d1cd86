//! Spanish reply text.

use cartera_core::{
  calendar::YearMonth,
  debt::Debt,
  ledger::{CategoryTotal, MonthSummary, Transaction, TransactionKind},
  money::format_cents,
  simulate::Affordability,
};
use cartera_tools::transactions::CandidateField;

pub const HELP: &str = "\
Comandos:
- saldo 12,500: registra tu saldo bancario (sin monto muestra el actual)
- presupuesto 6000 [YYYY-MM]: tope de gasto variable del mes
- debt Visa balance=12000 min=500 due=15 priority=alta [dna=true]: guarda una deuda
- deudas: lista tus deudas
- puedo comprar 1200 \"audifonos\" [YYYY-MM-DD]: simula una compra
- resumen [YYYY-MM]: resumen del mes
- gasto 87 \"comida\" [YYYY-MM-DD] o ingreso 15000 nomina: registra una transaccion
- corregir 95 \"comida\": corrige la ultima transaccion
- deshacer: borra la ultima transaccion";

pub const EXAMPLE_TRANSACTION: &str = "Ejemplo: gasto 87 \"comida\" o ingreso 15000 nomina.";

pub fn debts(debts: &[Debt]) -> String {
  if debts.is_empty() {
    return "No tienes deudas registradas.".to_owned();
  }
  let lines: Vec<String> = debts.iter().map(debt_line).collect();
  format!("Deudas:\n{}", lines.join("\n"))
}

fn debt_line(debt: &Debt) -> String {
  let money = |v: Option<i64>| v.map(format_cents).unwrap_or_else(|| "sin dato".to_owned());
  let due   = debt
    .due_day_of_month
    .map(|d| format!("dia {d}"))
    .unwrap_or_else(|| "sin fecha".to_owned());
  let mut line = format!(
    "- {}: saldo {}, minimo {}, vence {}, prioridad {}",
    debt.name,
    money(debt.balance),
    money(debt.minimum_payment),
    due,
    debt.priority,
  );
  if debt.do_not_accelerate {
    line.push_str(" (no acelerar)");
  }
  line
}

pub fn affordability(result: &Affordability) -> String {
  let mut parts = vec![format!("Asequible: {}.", if result.affordable { "Si" } else { "No" })];
  if !result.reasons.is_empty() {
    let reasons: Vec<&str> = result.reasons.iter().map(|r| r.message()).collect();
    parts.push(format!("Razones: {}.", reasons.join("; ")));
  }
  parts.push(format!("Disponible variable: {}.", format_cents(result.variable_remaining)));

  let obligations: Vec<String> = result
    .next_obligations
    .iter()
    .map(|o| {
      let due = o.due_date.map(|d| d.to_string()).unwrap_or_else(|| "sin fecha".to_owned());
      format!("{}: {} ({due})", o.name, format_cents(o.amount))
    })
    .collect();
  if obligations.is_empty() {
    parts.push("Obligaciones: ninguna.".to_owned());
  } else {
    parts.push(format!("Obligaciones: {}", obligations.join(" | ")));
  }
  parts.join(" ")
}

pub fn month_summary(month: YearMonth, summary: &MonthSummary, categories: &[CategoryTotal]) -> String {
  let mut reply = format!(
    "Resumen {month}: Ingresos {}, Gastos {}, Variable restante {}.",
    format_cents(summary.income_total),
    format_cents(summary.expense_total),
    format_cents(summary.variable_remaining),
  );
  if !categories.is_empty() {
    let lines: Vec<String> = categories
      .iter()
      .map(|c| format!("{} ({}): {}", c.category, c.category_type, format_cents(c.expense_total)))
      .collect();
    reply.push_str(" Categorias: ");
    reply.push_str(&lines.join(" | "));
  }
  reply
}

/// `gasto $87.00 MXN en Openai (2026-02-05)`
pub fn transaction(tx: &Transaction) -> String {
  let kind = match tx.kind {
    TransactionKind::Expense => "gasto",
    TransactionKind::Income => "ingreso",
  };
  format!("{kind} {} en {} ({})", format_cents(tx.amount), tx.category, tx.date)
}

pub fn missing_fields(fields: &[CandidateField]) -> String {
  let names: Vec<&str> = fields
    .iter()
    .map(|f| match f {
      CandidateField::Type => "tipo",
      CandidateField::Amount => "monto",
      CandidateField::CategoryType => "tipo de categoria",
      CandidateField::Category => "categoria",
      CandidateField::Date => "fecha",
    })
    .collect();
  format!(
    "Necesito mas datos para registrar la transaccion. Falta: {}. {EXAMPLE_TRANSACTION}",
    names.join(", ")
  )
}
