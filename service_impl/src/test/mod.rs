#[cfg(test)]
mod absence;
#[cfg(test)]
mod compliance;
#[cfg(test)]
mod contract_history;
#[cfg(test)]
mod holiday_profile;
#[cfg(test)]
mod payroll;
#[cfg(test)]
mod recurring_shift;
#[cfg(test)]
mod shift;
