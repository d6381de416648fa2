//! CSV ledger loaders.
//!
//! Each ledger loads from its own CSV file through a flat record type,
//! then converts into the typed line with validation. Expected columns:
//!
//!   revenue.csv:   id, client, status, type, units, unit_price,
//!                  churn_pct, upsell_pct, win_probability_pct
//!   cogs.csv:      id, product, vendor, cost_per_unit, forecasted_units
//!   opex.csv:      id, department, category, monthly_cost, expense_type,
//!                  ai_baseline
//!   headcount.csv: id, name, title, department, annual_salary, raise_pct,
//!                  bonus_pct, status, start_date, termination_date
//!   capex.csv:     id, asset, cost, purchase_date, useful_life_years
//!
//! Percentages outside [0, 100] and negative volumes or amounts are
//! parse-time validation errors, so a line that reaches the engine is
//! already inside the computations' input domain.

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::numeric::valid_pct;
use crate::types::{
    CapexItem, CogsLine, DealStage, Employee, EmployeeStatus, ExpenseType, OpexLine, Retention,
    RevenueKind, RevenueLine,
};

// ---------------------------------------------------------------------------
// Flat CSV records
// ---------------------------------------------------------------------------

/// Revenue row as it appears in the CSV: status and adjustment columns
/// flat, converted into the `DealStage` sum type on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueRecord {
    pub id: String,
    pub client: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub units: f64,
    pub unit_price: f64,
    #[serde(default)]
    pub churn_pct: f64,
    #[serde(default)]
    pub upsell_pct: f64,
    #[serde(default)]
    pub win_probability_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CogsRecord {
    pub id: String,
    pub product: String,
    pub vendor: String,
    pub cost_per_unit: f64,
    pub forecasted_units: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpexRecord {
    pub id: String,
    pub department: String,
    pub category: String,
    pub monthly_cost: f64,
    pub expense_type: String,
    #[serde(default)]
    pub ai_baseline: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: String,
    pub name: String,
    pub title: String,
    pub department: String,
    pub annual_salary: f64,
    #[serde(default)]
    pub raise_pct: f64,
    #[serde(default)]
    pub bonus_pct: f64,
    pub status: String,
    pub start_date: String,
    #[serde(default)]
    pub termination_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapexRecord {
    pub id: String,
    pub asset: String,
    pub cost: f64,
    pub purchase_date: String,
    pub useful_life_years: u32,
}

// ---------------------------------------------------------------------------
// Record → line conversion
// ---------------------------------------------------------------------------

fn parse_kind(raw: &str) -> Result<RevenueKind, String> {
    match raw.to_lowercase().replace(['-', '_', ' '], "").as_str() {
        "recurring" => Ok(RevenueKind::Recurring),
        "services" => Ok(RevenueKind::Services),
        "onetime" => Ok(RevenueKind::OneTime),
        other => Err(format!("unknown revenue type '{other}'")),
    }
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("{field} '{raw}' is not a YYYY-MM-DD date"))
}

fn check_pct(value: f64, field: &str) -> Result<(), String> {
    if valid_pct(value) {
        Ok(())
    } else {
        Err(format!("{field} {value} out of range [0, 100]"))
    }
}

fn check_non_negative(value: f64, field: &str) -> Result<(), String> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{field} {value} must be non-negative"))
    }
}

impl RevenueRecord {
    pub fn into_line(self) -> Result<RevenueLine, String> {
        check_non_negative(self.units, "units")?;
        check_non_negative(self.unit_price, "unit_price")?;
        let kind = parse_kind(&self.kind)?;
        let stage = match self.status.trim().to_lowercase().as_str() {
            "existing" => {
                check_pct(self.churn_pct, "churn_pct")?;
                check_pct(self.upsell_pct, "upsell_pct")?;
                DealStage::Existing {
                    retention: Retention {
                        churn_pct: self.churn_pct,
                        upsell_pct: self.upsell_pct,
                    },
                }
            }
            "pipeline" => {
                check_pct(self.win_probability_pct, "win_probability_pct")?;
                DealStage::Pipeline {
                    win_probability_pct: self.win_probability_pct,
                }
            }
            other => return Err(format!("unknown status '{other}'")),
        };
        Ok(RevenueLine {
            id: self.id,
            client: self.client,
            kind,
            stage,
            units: self.units,
            unit_price: self.unit_price,
        })
    }
}

impl CogsRecord {
    pub fn into_line(self) -> Result<CogsLine, String> {
        check_non_negative(self.cost_per_unit, "cost_per_unit")?;
        check_non_negative(self.forecasted_units, "forecasted_units")?;
        Ok(CogsLine {
            id: self.id,
            product: self.product,
            vendor: self.vendor,
            cost_per_unit: self.cost_per_unit,
            forecasted_units: self.forecasted_units,
        })
    }
}

impl OpexRecord {
    pub fn into_line(self) -> Result<OpexLine, String> {
        check_non_negative(self.monthly_cost, "monthly_cost")?;
        let expense_type = match self.expense_type.to_lowercase().replace(['-', '_', ' '], "").as_str()
        {
            "recurring" => ExpenseType::Recurring,
            "onetime" => ExpenseType::OneTime,
            other => return Err(format!("unknown expense type '{other}'")),
        };
        Ok(OpexLine {
            id: self.id,
            department: self.department,
            category: self.category,
            monthly_cost: self.monthly_cost,
            expense_type,
            ai_baseline: self.ai_baseline,
        })
    }
}

impl EmployeeRecord {
    pub fn into_employee(self) -> Result<Employee, String> {
        check_non_negative(self.annual_salary, "annual_salary")?;
        check_pct(self.raise_pct, "raise_pct")?;
        check_pct(self.bonus_pct, "bonus_pct")?;
        let status = match self.status.to_lowercase().replace([' ', '_'], "").as_str() {
            "active" => EmployeeStatus::Active,
            "newhire" => EmployeeStatus::NewHire,
            other => return Err(format!("unknown employee status '{other}'")),
        };
        let start_date = parse_date(&self.start_date, "start_date")?;
        let termination_date = if self.termination_date.trim().is_empty() {
            None
        } else {
            Some(parse_date(&self.termination_date, "termination_date")?)
        };
        Ok(Employee {
            id: self.id,
            name: self.name,
            title: self.title,
            department: self.department,
            annual_salary: self.annual_salary,
            raise_pct: self.raise_pct,
            bonus_pct: self.bonus_pct,
            status,
            start_date,
            termination_date,
        })
    }
}

impl CapexRecord {
    pub fn into_item(self) -> Result<CapexItem, String> {
        check_non_negative(self.cost, "cost")?;
        if self.useful_life_years == 0 {
            return Err("useful_life_years must be at least 1".into());
        }
        let purchase_date = parse_date(&self.purchase_date, "purchase_date")?;
        Ok(CapexItem {
            id: self.id,
            asset: self.asset,
            cost: self.cost,
            purchase_date,
            useful_life_years: self.useful_life_years,
        })
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn read_records<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let record: T =
            result.map_err(|e| format!("CSV parse error at line {}: {}", line_num + 2, e))?;
        records.push(record);
    }
    Ok(records)
}

fn convert<T, L>(
    records: Vec<T>,
    into: impl Fn(T) -> Result<L, String>,
    id: impl Fn(&T) -> &str,
) -> Result<Vec<L>, String> {
    records
        .into_iter()
        .map(|r| {
            let line_id = id(&r).to_string();
            into(r).map_err(|e| format!("invalid record '{line_id}': {e}"))
        })
        .collect()
}

pub fn load_revenue<R: Read>(reader: R) -> Result<Vec<RevenueLine>, String> {
    convert(read_records(reader)?, RevenueRecord::into_line, |r| &r.id)
}

pub fn load_cogs<R: Read>(reader: R) -> Result<Vec<CogsLine>, String> {
    convert(read_records(reader)?, CogsRecord::into_line, |r| &r.id)
}

pub fn load_opex<R: Read>(reader: R) -> Result<Vec<OpexLine>, String> {
    convert(read_records(reader)?, OpexRecord::into_line, |r| &r.id)
}

pub fn load_headcount<R: Read>(reader: R) -> Result<Vec<Employee>, String> {
    convert(read_records(reader)?, EmployeeRecord::into_employee, |r| {
        &r.id
    })
}

pub fn load_capex<R: Read>(reader: R) -> Result<Vec<CapexItem>, String> {
    convert(read_records(reader)?, CapexRecord::into_item, |r| &r.id)
}

fn open(path: &str) -> Result<std::fs::File, String> {
    std::fs::File::open(path).map_err(|e| format!("Failed to open '{path}': {e}"))
}

pub fn load_revenue_file(path: &str) -> Result<Vec<RevenueLine>, String> {
    load_revenue(open(path)?)
}

pub fn load_cogs_file(path: &str) -> Result<Vec<CogsLine>, String> {
    load_cogs(open(path)?)
}

pub fn load_opex_file(path: &str) -> Result<Vec<OpexLine>, String> {
    load_opex(open(path)?)
}

pub fn load_headcount_file(path: &str) -> Result<Vec<Employee>, String> {
    load_headcount(open(path)?)
}

pub fn load_capex_file(path: &str) -> Result<Vec<CapexItem>, String> {
    load_capex(open(path)?)
}

/// Group opex lines by department, sorted by department name.
pub fn group_by_department(lines: &[OpexLine]) -> Vec<(String, Vec<OpexLine>)> {
    let mut groups: HashMap<String, Vec<OpexLine>> = HashMap::new();
    for line in lines {
        groups
            .entry(line.department.clone())
            .or_default()
            .push(line.clone());
    }
    let mut result: Vec<_> = groups.into_iter().collect();
    result.sort_by(|a, b| a.0.cmp(&b.0));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const REVENUE_CSV: &str = "\
id,client,status,type,units,unit_price,churn_pct,upsell_pct,win_probability_pct
rev-1,Acme Corp,Existing,Recurring,100,500,10,20,0
rev-2,Delta Services,Existing,Services,1,45000,0,0,0
rev-3,Northwind,Pipeline,Recurring,50,450,0,0,50
";

    const HEADCOUNT_CSV: &str = "\
id,name,title,department,annual_salary,raise_pct,bonus_pct,status,start_date,termination_date
emp-1,Jordan Reyes,Engineer,Engineering,150000,5,10,New Hire,2025-03-01,
emp-2,Sam Okafor,AE,Sales,90000,3,15,Active,2022-06-01,2025-09-30
";

    #[test]
    fn revenue_rows_become_staged_lines() {
        let lines = load_revenue(REVENUE_CSV.as_bytes()).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(matches!(lines[0].stage, DealStage::Existing { .. }));
        assert_eq!(lines[1].kind, RevenueKind::Services);
        match lines[2].stage {
            DealStage::Pipeline {
                win_probability_pct,
            } => assert_eq!(win_probability_pct, 50.0),
            _ => panic!("rev-3 should be a pipeline line"),
        }
    }

    #[test]
    fn out_of_range_percent_is_rejected_not_clamped() {
        let csv_data = "\
id,client,status,type,units,unit_price,churn_pct,upsell_pct,win_probability_pct
rev-9,Acme,Existing,Recurring,10,100,150,0,0
";
        let err = load_revenue(csv_data.as_bytes()).unwrap_err();
        assert!(err.contains("rev-9"));
        assert!(err.contains("churn_pct"));
    }

    #[test]
    fn negative_units_are_rejected() {
        let csv_data = "\
id,client,status,type,units,unit_price,churn_pct,upsell_pct,win_probability_pct
rev-9,Acme,Existing,Recurring,-5,100,0,0,0
";
        assert!(load_revenue(csv_data.as_bytes()).is_err());
    }

    #[test]
    fn employee_dates_parse_and_blank_termination_is_none() {
        let employees = load_headcount(HEADCOUNT_CSV.as_bytes()).unwrap();
        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].termination_date, None);
        assert_eq!(employees[0].status, EmployeeStatus::NewHire);
        assert_eq!(
            employees[1].termination_date,
            Some(NaiveDate::from_ymd_opt(2025, 9, 30).unwrap())
        );
    }

    #[test]
    fn malformed_date_names_the_record() {
        let csv_data = "\
id,name,title,department,annual_salary,raise_pct,bonus_pct,status,start_date,termination_date
emp-9,Pat,Engineer,Engineering,100000,0,0,Active,03/01/2025,
";
        let err = load_headcount(csv_data.as_bytes()).unwrap_err();
        assert!(err.contains("emp-9"));
        assert!(err.contains("start_date"));
    }

    #[test]
    fn capex_zero_life_is_rejected() {
        let csv_data = "\
id,asset,cost,purchase_date,useful_life_years
cap-1,Laptop fleet,60000,2025-02-01,0
";
        assert!(load_capex(csv_data.as_bytes()).is_err());
    }

    #[test]
    fn opex_groups_by_department() {
        let csv_data = "\
id,department,category,monthly_cost,expense_type,ai_baseline
opex-1,Sales,Travel,5000,Recurring,4500
opex-2,Engineering,Tooling,2000,Recurring,2000
opex-3,Sales,Events,3000,One-Time,2800
";
        let lines = load_opex(csv_data.as_bytes()).unwrap();
        let groups = group_by_department(&lines);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Engineering");
        assert_eq!(groups[1].1.len(), 2);
    }
}
