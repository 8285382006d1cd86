//! Turns one chat message into one reply.
//!
//! Every outcome, including tool failures, ends up as reply text; nothing
//! here returns an error to the transport.

use cartera_core::{
  debt::valid_due_day,
  money::{format_cents, parse_amount},
  store::FinanceStore,
  text::{cat_prefix, explicit_date, extract_date, extract_month, quoted, strip_date_tokens},
};
use cartera_tools::{
  ErrorCode, ScopeInput, ToolError, Toolbox,
  balance::{GetBankBalanceInput, SetBankBalanceInput},
  budget::SetBudgetCapInput,
  debts::{AddOrUpdateDebtInput, DebtInput, GetDebtsInput},
  simulate::{Assumptions, PurchaseInput, SimulatePurchaseInput},
  summary::MonthInput,
  transactions::{
    AddTransactionInput, DeleteLastTransactionInput, ParseTransactionInput, TransactionPatch,
    UpdateLastTransactionInput,
  },
};
use tracing::info;

use crate::{
  command::{self, Command, DebtArgs},
  format,
};

/// A message as the transport delivers it.
#[derive(Debug, Clone)]
pub struct Incoming {
  pub user_id:   String,
  pub thread_id: String,
  pub text:      String,
  /// RFC 3339 instant the message is interpreted at.
  pub now_iso:   String,
}

impl Incoming {
  fn scope(&self) -> ScopeInput { ScopeInput::new(&self.user_id, &self.thread_id) }
}

type Reply = Result<String, String>;

/// Handle one message and produce the reply text.
pub async fn handle_text<S: FinanceStore>(tools: &Toolbox<S>, input: &Incoming) -> String {
  let command = command::parse(&input.text);
  info!(thread = %input.thread_id, ?command, "handling message");

  let reply = match command {
    Command::Empty => Ok("Mensaje vacio.".to_owned()),
    Command::Help => Ok(format::HELP.to_owned()),
    Command::ListDebts => list_debts(tools, input).await,
    Command::ShowBalance => show_balance(tools, input).await,
    Command::SetBalance(rest) => set_balance(tools, input, &rest).await,
    Command::SetBudget(rest) => set_budget(tools, input, &rest).await,
    Command::SetDebt(rest) => set_debt(tools, input, &rest).await,
    Command::Simulate(rest) => simulate(tools, input, &rest).await,
    Command::Summary(rest) => summary(tools, input, &rest).await,
    Command::Undo => undo(tools, input).await,
    Command::Correct(rest) => correct(tools, input, &rest).await,
    Command::Transaction(text) => transaction(tools, input, &text).await,
  };
  reply.unwrap_or_else(|e| e)
}

fn failure(err: ToolError) -> String { format!("Error: {}", err.message) }

/// Amount in `text`, ignoring date and month tokens.
fn amount_in(text: &str) -> Option<i64> { parse_amount(&strip_date_tokens(text)) }

// ─── Balance and budget ──────────────────────────────────────────────────────

async fn show_balance<S: FinanceStore>(tools: &Toolbox<S>, input: &Incoming) -> Reply {
  match tools.get_bank_balance(GetBankBalanceInput { scope: input.scope() }).await {
    Ok(balance) => Ok(format!(
      "Saldo actual: {} (al {}).",
      format_cents(balance.amount),
      balance.as_of.date_naive(),
    )),
    Err(e) if e.code == ErrorCode::NotFound => {
      Ok("Aun no hay saldo registrado. Usa: saldo 12,500.".to_owned())
    }
    Err(e) => Err(failure(e)),
  }
}

async fn set_balance<S: FinanceStore>(tools: &Toolbox<S>, input: &Incoming, rest: &str) -> Reply {
  let amount = amount_in(rest).ok_or("No pude leer el monto de saldo.")?;
  tools
    .set_bank_balance(SetBankBalanceInput {
      scope: input.scope(),
      bank_balance_mxn_cents: Some(amount),
      as_of_iso: None,
      now_iso: Some(input.now_iso.clone()),
    })
    .await
    .map_err(failure)?;
  Ok(format!("Saldo actualizado: {}.", format_cents(amount)))
}

async fn set_budget<S: FinanceStore>(tools: &Toolbox<S>, input: &Incoming, rest: &str) -> Reply {
  let amount    = amount_in(rest).ok_or("No pude leer el monto del presupuesto.")?;
  let reference = tools.local_reference(&input.now_iso);
  let month     = extract_month(rest, reference.as_deref())
    .ok_or("No pude determinar el mes (YYYY-MM).")?;

  let budget = tools
    .set_budget_cap(SetBudgetCapInput {
      scope: input.scope(),
      variable_cap_mxn_cents: Some(amount),
      effective_month: Some(month),
    })
    .await
    .map_err(failure)?;
  Ok(format!(
    "Presupuesto establecido para {}: {}.",
    budget.effective_month,
    format_cents(budget.variable_cap),
  ))
}

// ─── Debts ───────────────────────────────────────────────────────────────────

async fn list_debts<S: FinanceStore>(tools: &Toolbox<S>, input: &Incoming) -> Reply {
  let list = tools.get_debts(GetDebtsInput { scope: input.scope() }).await.map_err(failure)?;
  Ok(format::debts(&list.debts))
}

async fn set_debt<S: FinanceStore>(tools: &Toolbox<S>, input: &Incoming, rest: &str) -> Reply {
  let args = DebtArgs::parse(rest);
  if args.name.is_empty() {
    return Err("Falta el nombre de la deuda.".to_owned());
  }
  let priority = args.field("priority").ok_or("Falta prioridad (priority=... ).")?;

  let balance = match args.field("balance") {
    Some(raw) => Some(parse_amount(raw).ok_or("No pude leer balance=.")?),
    None => None,
  };
  let minimum = match args.field("min") {
    Some(raw) => Some(parse_amount(raw).ok_or("No pude leer min=.")?),
    None => None,
  };
  let due = match args.field("due") {
    Some(raw) => Some(due_day(raw).ok_or("due= debe ser un numero entre 1 y 31.")?),
    None => None,
  };
  let do_not_accelerate = match args.field("dna").map(str::to_lowercase).as_deref() {
    Some("true") => Some(true),
    Some("false") => Some(false),
    _ => None,
  };

  let stored = tools
    .add_or_update_debt(AddOrUpdateDebtInput {
      scope: input.scope(),
      debt:  Some(DebtInput {
        name: Some(args.name.clone()),
        balance_mxn_cents: balance,
        minimum_payment_mxn_cents: minimum,
        due_day_of_month: due.map(i64::from),
        priority: Some(priority.to_owned()),
        do_not_accelerate,
      }),
    })
    .await
    .map_err(failure)?;
  Ok(format!("Deuda guardada: {}.", stored.stored.name))
}

/// Any integral number reads as a day, so `15.0` and `+15` mean the 15th.
fn due_day(raw: &str) -> Option<u32> {
  let n = raw.parse::<f64>().ok().filter(|n| n.is_finite() && n.fract() == 0.0)?;
  Some(n as u32).filter(|d| *d as f64 == n && valid_due_day(*d))
}

// ─── Simulation and summary ──────────────────────────────────────────────────

async fn simulate<S: FinanceStore>(tools: &Toolbox<S>, input: &Incoming, rest: &str) -> Reply {
  let amount    = amount_in(rest).ok_or("No pude leer el monto.")?;
  let reference = tools.local_reference(&input.now_iso);
  let date      = extract_date(rest, reference.as_deref())
    .ok_or("No pude determinar la fecha (YYYY-MM-DD).")?;
  let category  = quoted(rest)
    .or_else(|| cat_prefix(rest))
    .ok_or("Falta categoria (usa comillas o cat:).")?;

  let result = tools
    .simulate_purchase(SimulatePurchaseInput {
      scope:       input.scope(),
      purchase:    Some(PurchaseInput {
        amount_mxn_cents: Some(amount),
        date_iso:         Some(date),
        category:         Some(category.to_owned()),
        description:      Some(input.text.clone()),
      }),
      assumptions: Some(Assumptions {
        cash_available_definition: Some("BANK_BALANCE_ONLY".to_owned()),
        include_cash:              Some(false),
      }),
    })
    .await
    .map_err(failure)?;
  Ok(format::affordability(&result))
}

async fn summary<S: FinanceStore>(tools: &Toolbox<S>, input: &Incoming, rest: &str) -> Reply {
  let reference = tools.local_reference(&input.now_iso);
  let month     = extract_month(rest, reference.as_deref())
    .ok_or("No pude determinar el mes (YYYY-MM).")?;
  let month_input = MonthInput { scope: input.scope(), month: Some(month) };

  let totals     = tools.get_month_summary(month_input.clone()).await.map_err(failure)?;
  let categories = tools.get_category_summary(month_input).await.map_err(failure)?;
  Ok(format::month_summary(totals.month, &totals, &categories.categories))
}

// ─── Transactions ────────────────────────────────────────────────────────────

async fn transaction<S: FinanceStore>(tools: &Toolbox<S>, input: &Incoming, text: &str) -> Reply {
  let parsed = tools
    .parse_transaction_from_text(ParseTransactionInput {
      scope:   input.scope(),
      text:    Some(text.to_owned()),
      now_iso: Some(input.now_iso.clone()),
    })
    .map_err(failure)?;

  let Some(entry) = parsed.complete() else {
    return Err(format::missing_fields(&parsed.missing_fields));
  };

  let stored = tools
    .add_transaction(AddTransactionInput { scope: input.scope(), transaction: Some(entry.into()) })
    .await
    .map_err(failure)?;
  Ok(format!("Registrado: {}.", format::transaction(&stored.stored)))
}

async fn undo<S: FinanceStore>(tools: &Toolbox<S>, input: &Incoming) -> Reply {
  match tools.delete_last_transaction(DeleteLastTransactionInput { scope: input.scope() }).await {
    Ok(deleted) => Ok(format!("Eliminado: {}.", format::transaction(&deleted.deleted))),
    Err(e) if e.code == ErrorCode::NotFound => Ok("No hay transacciones para deshacer.".to_owned()),
    Err(e) => Err(failure(e)),
  }
}

async fn correct<S: FinanceStore>(tools: &Toolbox<S>, input: &Incoming, rest: &str) -> Reply {
  let patch = TransactionPatch {
    amount_mxn_cents: amount_in(rest),
    category: quoted(rest).map(str::to_owned),
    date_iso: explicit_date(rest).map(str::to_owned),
    ..Default::default()
  };
  if patch.is_empty() {
    return Err("Dime que corregir, por ejemplo: corregir 95 \"comida\" 2026-02-05.".to_owned());
  }

  match tools
    .update_last_transaction(UpdateLastTransactionInput { scope: input.scope(), patch: Some(patch) })
    .await
  {
    Ok(updated) => Ok(format!("Corregido: {}.", format::transaction(&updated.current))),
    Err(e) if e.code == ErrorCode::NotFound => Ok("No hay transaccion para corregir.".to_owned()),
    Err(e) => Err(failure(e)),
  }
}
