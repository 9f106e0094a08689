/*!
 * Data Structures
 *
 * - `ByteSink`: growable accumulator callers drain pipe output into
 */

mod byte_sink;

pub use byte_sink::ByteSink;
