/*
Output side of the sampler: when to write (cadence) and where to write (sinks).

Neither part knows anything about moves. The sampler asks the cadence
controller which outputs are due after a sweep and hands the records to a sink.
*/

pub mod cadence;
pub mod sink;
