//! Price of one unit of product.
//!
//! $$ p_t = (f_t + e_t + \tau_t) \frac{m_t}{100} + c_t \, \theta_t \, H(c_t) $$
//!
//! with $f$ the factory cost, $e$ the cost of the consumed streams, $\tau$ the transport
//! cost, $m$ the margin in percent, $c$ the carbon intensity and $\theta$ the CO2 tax.
//! The step $H$ keeps sequestering technologies from earning a tax credit.
//! The price without taxes drops the last term.

use crate::errors::{RSTechError, RSTechResult};
use crate::parameters::TechnoParameters;
use crate::scalar::{positive_part_mask, FloatValue, Scalar};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use std::collections::BTreeMap;

/// Economic constants of the price computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceModel {
    /// Capital recovery factor, yearly share of the capex to repay
    pub crf: FloatValue,
    /// Yearly opex as a fraction of capex
    pub opex_percentage: FloatValue,
    pub transport_conversion: FloatValue,
}

/// Price breakdown per year, in the unit of the normalised capex.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable<T> {
    pub capex: Array1<T>,
    /// Capex annuity plus opex
    pub factory: Array1<T>,
    /// Cost of each consumed stream
    pub stream_costs: BTreeMap<String, Array1<T>>,
    /// Sum of `stream_costs`
    pub energy_costs: Array1<T>,
    pub transport: Array1<T>,
    pub co2_taxes: Array1<T>,
    /// Margin, in percent
    pub margin: Array1<T>,
    pub total: Array1<T>,
    pub total_wotaxes: Array1<T>,
}

/// Per-year inputs of [`PriceModel::compute_price`].
#[derive(Debug, Clone, Copy)]
pub struct PriceDrivers<'a, T> {
    pub capex: ArrayView1<'a, T>,
    pub transport_cost: ArrayView1<'a, T>,
    /// Transport margin, in percent
    pub transport_margin: ArrayView1<'a, T>,
    /// Margin, in percent
    pub margin: ArrayView1<'a, T>,
    /// Carbon intensity of the product
    pub carbon_intensity: ArrayView1<'a, T>,
    pub co2_taxes: ArrayView1<'a, T>,
}

/// Cost of each consumed stream, `need * price`.
///
/// Fails when a consumed stream has no price.
pub fn stream_costs<T: Scalar>(
    needs: &BTreeMap<String, Array1<FloatValue>>,
    prices: &BTreeMap<String, Array1<T>>,
) -> RSTechResult<BTreeMap<String, Array1<T>>> {
    needs
        .iter()
        .map(|(stream, need)| {
            let price = prices
                .get(stream)
                .ok_or_else(|| RSTechError::MissingInput(format!("price of {stream}")))?;
            let cost = Zip::from(need)
                .and(price)
                .map_collect(|&n, &p| T::real(n) * p);
            Ok((stream.clone(), cost))
        })
        .collect()
}

impl PriceModel {
    pub fn from_parameters(parameters: &TechnoParameters) -> Self {
        Self {
            crf: parameters.capital_recovery_factor(),
            opex_percentage: parameters.opex_percentage,
            transport_conversion: parameters.transport_conversion,
        }
    }

    /// Factory cost, $K (CRF + opex)$.
    pub fn factory_cost<T: Scalar>(&self, capex: ArrayView1<T>) -> Array1<T> {
        let factor = T::real(self.crf + self.opex_percentage);
        capex.mapv(|k| k * factor)
    }

    pub fn transport_cost<T: Scalar>(
        &self,
        transport_cost: ArrayView1<T>,
        transport_margin: ArrayView1<T>,
    ) -> Array1<T> {
        let conversion = T::real(100.0 * self.transport_conversion);
        Zip::from(transport_cost)
            .and(transport_margin)
            .map_collect(|&cost, &margin| cost * margin / conversion)
    }

    /// CO2 tax per unit of product, zero for non-positive intensities.
    pub fn co2_tax_cost<T: Scalar>(
        &self,
        carbon_intensity: ArrayView1<T>,
        co2_taxes: ArrayView1<T>,
    ) -> Array1<T> {
        Zip::from(carbon_intensity)
            .and(co2_taxes)
            .map_collect(|&ci, &tax| ci * tax * T::real(positive_part_mask(ci)))
    }

    pub fn compute_price<T: Scalar>(
        &self,
        drivers: PriceDrivers<'_, T>,
        stream_costs: BTreeMap<String, Array1<T>>,
    ) -> PriceTable<T> {
        let n = drivers.capex.len();
        let factory = self.factory_cost(drivers.capex);
        let mut energy_costs = Array1::from_elem(n, T::zero());
        for cost in stream_costs.values() {
            energy_costs = energy_costs + cost;
        }
        let transport = self.transport_cost(drivers.transport_cost, drivers.transport_margin);
        let co2_taxes = self.co2_tax_cost(drivers.carbon_intensity, drivers.co2_taxes);

        let hundred = T::real(100.0);
        let mut total_wotaxes = Array1::from_elem(n, T::zero());
        Zip::from(&mut total_wotaxes)
            .and(&factory)
            .and(&energy_costs)
            .and(&transport)
            .and(drivers.margin)
            .for_each(|out, &f, &e, &t, &m| *out = (f + e + t) * m / hundred);
        let total = &total_wotaxes + &co2_taxes;

        PriceTable {
            capex: drivers.capex.to_owned(),
            factory,
            stream_costs,
            energy_costs,
            transport,
            co2_taxes,
            margin: drivers.margin.to_owned(),
            total,
            total_wotaxes,
        }
    }

    /// Price Jacobian with respect to the investment, identical with and without taxes.
    pub fn invest_gradient(
        &self,
        capex_gradient: ArrayView2<FloatValue>,
        margin: ArrayView1<FloatValue>,
    ) -> Array2<FloatValue> {
        let mut gradient = capex_gradient.to_owned();
        let factor = self.crf + self.opex_percentage;
        for (mut row, &m) in gradient.rows_mut().into_iter().zip(margin) {
            row *= factor * m / 100.0;
        }
        gradient
    }
}

/// Diagonal of the price Jacobian with respect to a consumed stream's price.
pub fn stream_price_gradient(
    need: ArrayView1<FloatValue>,
    margin: ArrayView1<FloatValue>,
) -> Array1<FloatValue> {
    &need * &margin / 100.0
}

/// Diagonal of the price Jacobian with respect to the CO2 tax.
pub fn co2_tax_gradient(carbon_intensity: ArrayView1<FloatValue>) -> Array1<FloatValue> {
    carbon_intensity.mapv(|ci| ci * positive_part_mask(ci))
}

/// Diagonal of the taxed price Jacobian with respect to a stream's emission factor.
pub fn emission_factor_gradient(
    need: ArrayView1<FloatValue>,
    co2_taxes: ArrayView1<FloatValue>,
    carbon_intensity: ArrayView1<FloatValue>,
) -> Array1<FloatValue> {
    Zip::from(need)
        .and(co2_taxes)
        .and(carbon_intensity)
        .map_collect(|&n, &tax, &ci| n * tax * positive_part_mask(ci))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradients::complex_step;
    use approx::assert_relative_eq;
    use is_close::is_close;
    use ndarray::array;
    use num::complex::Complex64;

    fn model() -> PriceModel {
        PriceModel {
            crf: 0.1,
            opex_percentage: 0.05,
            transport_conversion: 1.0,
        }
    }

    fn needs() -> BTreeMap<String, Array1<f64>> {
        BTreeMap::from([
            ("methane".to_string(), array![1.3, 1.3, 1.2]),
            ("electricity".to_string(), array![0.02, 0.02, 0.02]),
        ])
    }

    fn prices() -> BTreeMap<String, Array1<f64>> {
        BTreeMap::from([
            ("methane".to_string(), array![30.0, 35.0, 40.0]),
            ("electricity".to_string(), array![90.0, 80.0, 70.0]),
            ("water".to_string(), array![1.0, 1.0, 1.0]),
        ])
    }

    #[test]
    fn stream_costs_only_cover_consumed_streams() {
        let costs = stream_costs(&needs(), &prices()).unwrap();
        assert_eq!(costs.len(), 2);
        assert!(is_close!(costs["methane"][1], 1.3 * 35.0));
    }

    #[test]
    fn missing_price_is_an_error() {
        let mut prices = prices();
        prices.remove("electricity");
        assert!(matches!(
            stream_costs(&needs(), &prices),
            Err(RSTechError::MissingInput(ref m)) if m.contains("electricity")
        ));
    }

    #[test]
    fn price_decomposition() {
        let model = model();
        let capex = array![100.0, 95.0, 90.0];
        let transport = array![2.0, 2.0, 2.0];
        let transport_margin = array![200.0, 200.0, 200.0];
        let margin = array![110.0, 110.0, 105.0];
        let ci = array![0.2, -0.1, 0.3];
        let tax = array![50.0, 60.0, 70.0];
        let table = model.compute_price(
            PriceDrivers {
                capex: capex.view(),
                transport_cost: transport.view(),
                transport_margin: transport_margin.view(),
                margin: margin.view(),
                carbon_intensity: ci.view(),
                co2_taxes: tax.view(),
            },
            stream_costs(&needs(), &prices()).unwrap(),
        );
        for t in 0..3 {
            let expected_wotaxes =
                (table.factory[t] + table.energy_costs[t] + table.transport[t]) * margin[t] / 100.0;
            assert!(is_close!(table.total_wotaxes[t], expected_wotaxes));
            assert!(is_close!(table.total[t], expected_wotaxes + table.co2_taxes[t]));
        }
        assert!(is_close!(table.factory[0], 15.0));
        assert!(is_close!(table.transport[0], 4.0));
        // No credit for a negative intensity
        assert_eq!(table.co2_taxes[1], 0.0);
        assert!(is_close!(table.co2_taxes[2], 21.0));
    }

    #[test]
    fn invest_gradient_scales_capex_gradient() {
        let model = model();
        let capex_gradient = array![[0.0, 0.0], [-2.0, -1.0]];
        let margin = array![100.0, 120.0];
        let gradient = model.invest_gradient(capex_gradient.view(), margin.view());
        assert_relative_eq!(gradient[[1, 0]], -2.0 * 0.15 * 1.2);
        assert_relative_eq!(gradient[[1, 1]], -1.0 * 0.15 * 1.2);
    }

    #[test]
    fn input_gradients_match_complex_step() {
        let model = model();
        let needs = needs();
        let prices = prices();
        let margin = array![110.0, 110.0, 105.0];
        let ci = array![0.2, -0.1, 0.3];
        let tax = array![50.0, 60.0, 70.0];
        let lift = |a: &Array1<f64>| a.mapv(|v| Complex64::new(v, 0.0));
        let price_with = |methane: ArrayView1<Complex64>, tax: ArrayView1<Complex64>| {
            let mut prices_c: BTreeMap<String, Array1<Complex64>> =
                prices.iter().map(|(k, v)| (k.clone(), lift(v))).collect();
            prices_c.insert("methane".to_string(), methane.to_owned());
            let capex = lift(&array![100.0, 95.0, 90.0]);
            let zeros = lift(&array![0.0, 0.0, 0.0]);
            let margin_c = lift(&margin);
            let ci_c = lift(&ci);
            model
                .compute_price(
                    PriceDrivers {
                        capex: capex.view(),
                        transport_cost: zeros.view(),
                        transport_margin: zeros.view(),
                        margin: margin_c.view(),
                        carbon_intensity: ci_c.view(),
                        co2_taxes: tax.view(),
                    },
                    stream_costs(&needs, &prices_c).unwrap(),
                )
                .total
        };

        let expected = complex_step(prices["methane"].view(), |x| {
            price_with(x, lift(&tax).view())
        });
        let analytic = stream_price_gradient(needs["methane"].view(), margin.view());
        for t in 0..3 {
            assert_relative_eq!(expected[[t, t]], analytic[t], max_relative = 1e-10);
        }

        let expected = complex_step(tax.view(), |x| price_with(lift(&prices["methane"]).view(), x));
        let analytic = co2_tax_gradient(ci.view());
        for t in 0..3 {
            assert_relative_eq!(expected[[t, t]], analytic[t], max_relative = 1e-10);
        }
    }

    #[test]
    fn emission_factor_gradient_masks_negative_intensity() {
        let gradient = emission_factor_gradient(
            array![2.0, 2.0].view(),
            array![10.0, 10.0].view(),
            array![0.5, -0.5].view(),
        );
        assert_eq!(gradient.to_vec(), vec![20.0, 0.0]);
    }
}
